pub mod messages;
pub mod request;

use byteorder::{BigEndian, WriteBytesExt};
use futures::future::select_ok;
use messages::metadata;
use request::{KafkaDeserializable, KafkaRequest, KafkaSerializable};
use std::io::{Cursor, Error, ErrorKind, Result};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::debug;

const CLIENT_ID: &str = "kafka-group-tools";

pub struct KafkaConnection {
    conn: TcpStream,
    correlation_id: i32,
    incoming: Cursor<Vec<u8>>,
    outgoing: Cursor<Vec<u8>>
}

impl KafkaConnection {
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<KafkaConnection> {
        TcpStream::connect(addr).await.map(KafkaConnection::with_stream)
    }

    pub fn with_stream(conn: TcpStream) -> KafkaConnection {
        KafkaConnection {
            conn,
            correlation_id: 0,
            incoming: Cursor::new(vec!(0; 64 * 1024)),
            outgoing: Cursor::new(vec!(0; 64 * 1024))
        }
    }

    pub async fn send <R: KafkaRequest>(&mut self, request: &R) -> Result<R::Response> {
        self.send_req(request).await?;
        self.read_resp().await
    }

    async fn send_req <R: KafkaRequest>(&mut self, request: &R) -> Result<()> {
        self.correlation_id = self.correlation_id.wrapping_add(1);
        self.outgoing.set_position(4);
        WriteBytesExt::write_i16::<BigEndian>(&mut self.outgoing, R::api_key())?;
        WriteBytesExt::write_i16::<BigEndian>(&mut self.outgoing, R::api_version())?;
        WriteBytesExt::write_i32::<BigEndian>(&mut self.outgoing, self.correlation_id)?;
        CLIENT_ID.to_string().serialize(&mut self.outgoing)?;
        request.serialize(&mut self.outgoing)?;
        let size = self.outgoing.position() as usize;
        self.outgoing.set_position(0);
        WriteBytesExt::write_i32::<BigEndian>(&mut self.outgoing, (size - 4) as i32)?;
        self.conn.write_all(&self.outgoing.get_ref()[0..size]).await?;
        self.conn.flush().await?;
        Ok(())
    }

    async fn read_resp <R: KafkaDeserializable>(&mut self) -> Result<R> {
        let len = self.conn.read_i32().await?;
        if len < 4 {
            return Err(Error::new(ErrorKind::InvalidData, format!("bad response length {}", len)));
        }
        let len = len as usize;
        if self.incoming.get_ref().len() < len {
            self.incoming.get_mut().resize(len, 0);
        }
        self.conn.read_exact(&mut self.incoming.get_mut()[0..len]).await?;

        self.incoming.set_position(0);
        let correlation_id = request::ReadBytesExt::read_i32::<BigEndian>(&mut self.incoming)?;
        if correlation_id != self.correlation_id {
            return Err(Error::new(ErrorKind::InvalidData, format!(
                "correlation id mismatch: sent {}, got {}", self.correlation_id, correlation_id)));
        }
        R::deserialize(&mut self.incoming)
    }
}

/// Asks every bootstrap server for cluster metadata at once and keeps the
/// first good answer. Each attempt is bounded by `timeout`.
pub async fn load_metadata(addrs: &[String], timeout: Duration) -> Result<metadata::Response> {
    if addrs.is_empty() {
        return Err(Error::new(ErrorKind::InvalidInput, "no bootstrap servers"));
    }

    let attempts = addrs.iter()
        .map(|addr| Box::pin(fetch_metadata(addr, timeout)));
    let (metadata, _) = select_ok(attempts).await?;
    Ok(metadata)
}

async fn fetch_metadata(addr: &str, timeout: Duration) -> Result<metadata::Response> {
    let fetch = async {
        let mut conn = KafkaConnection::connect(addr).await?;
        conn.send(&metadata::Request::all_topics()).await
    };

    match tokio::time::timeout(timeout, fetch).await {
        Ok(Ok(metadata)) => {
            debug!(server = addr, topics = metadata.topic_metadata.len(), "loaded cluster metadata");
            Ok(metadata)
        },
        Ok(Err(e)) => {
            debug!(server = addr, error = %e, "metadata request failed");
            Err(Error::new(e.kind(), format!("{}: {}", addr, e)))
        },
        Err(_) => Err(Error::new(ErrorKind::TimedOut, format!("{}: metadata request timed out", addr)))
    }
}
