pub use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
pub use std::io::{Read, Result, Write};
use std::io::{Error, ErrorKind};

pub trait KafkaSerializable {
    fn serialize<W: Write>(&self, out: &mut W) -> Result<()>;
}

pub trait KafkaDeserializable: Sized {
    fn deserialize<R: Read>(stream: &mut R) -> Result<Self>;
}

impl KafkaSerializable for bool {
    fn serialize<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(&[*self as u8])
    }
}

impl KafkaDeserializable for bool {
    fn deserialize<R: Read>(stream: &mut R) -> Result<Self> {
        let mut data = [0 as u8];
        stream.read_exact(&mut data)?;
        Ok(data[0] != 0)
    }
}

impl KafkaSerializable for i16 {
    fn serialize<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_i16::<BigEndian>(*self)
    }
}

impl KafkaDeserializable for i16 {
    fn deserialize<R: Read>(stream: &mut R) -> Result<Self> {
        stream.read_i16::<BigEndian>()
    }
}

impl KafkaSerializable for i32 {
    fn serialize<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_i32::<BigEndian>(*self)
    }
}

impl KafkaDeserializable for i32 {
    fn deserialize<R: Read>(stream: &mut R) -> Result<Self> {
        stream.read_i32::<BigEndian>()
    }
}

impl KafkaSerializable for String {
    fn serialize<W: Write>(&self, out: &mut W) -> Result<()> {
        (self.len() as i16).serialize(out)?;
        out.write_all(self.as_bytes())
    }
}

impl KafkaDeserializable for String {
    fn deserialize<R: Read>(stream: &mut R) -> Result<Self> {
        let len = i16::deserialize(stream)?;
        if len < 0 {
            return Err(Error::new(ErrorKind::InvalidData, "unexpected null string"));
        }
        read_utf8(stream, len as usize)
    }
}

impl KafkaDeserializable for Option<String> {
    fn deserialize<R: Read>(stream: &mut R) -> Result<Self> {
        let len = i16::deserialize(stream)?;
        if len == -1 {
            Ok(None)
        } else {
            read_utf8(stream, len as usize).map(Some)
        }
    }
}

fn read_utf8<R: Read>(stream: &mut R, len: usize) -> Result<String> {
    let mut data = vec!(0; len);
    stream.read_exact(&mut data)?;
    String::from_utf8(data).map_err(|e| Error::new(ErrorKind::InvalidData, e))
}

impl <T: KafkaSerializable> KafkaSerializable for Vec<T> {
    fn serialize<W: Write>(&self, out: &mut W) -> Result<()> {
        (self.len() as i32).serialize(out)?;
        for i in self.iter() {
            i.serialize(out)?;
        }
        Ok(())
    }
}

impl <T: KafkaDeserializable> KafkaDeserializable for Vec<T> {
    fn deserialize<R: Read>(stream: &mut R) -> Result<Self> {
        let len = i32::deserialize(stream)?;
        let mut result = Vec::new();
        for _ in 0..len {
            result.push(T::deserialize(stream)?);
        }
        Ok(result)
    }
}

impl <T: KafkaSerializable> KafkaSerializable for Option<Vec<T>> {
    fn serialize<W: Write>(&self, out: &mut W) -> Result<()> {
        match self {
            None => (-1 as i32).serialize(out),
            Some(v) => v.serialize(out)
        }
    }
}

pub trait KafkaRequest: KafkaSerializable {
    type Response: KafkaDeserializable;
    fn api_key() -> i16;
    fn api_version() -> i16;
}
