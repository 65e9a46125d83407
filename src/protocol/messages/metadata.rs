use crate::protocol::request::*;

/// Metadata v6. `topics: None` asks for every topic in the cluster.
#[derive(Debug, Clone)]
pub struct Request {
    pub topics: Option<Vec<String>>,
    pub allow_auto_topic_creation: bool
}

impl Request {
    pub fn all_topics() -> Request {
        Request {
            topics: None,
            allow_auto_topic_creation: false
        }
    }
}

impl KafkaSerializable for Request {
    fn serialize<W: Write>(&self, out: &mut W) -> Result<()> {
        self.topics.serialize(out)?;
        self.allow_auto_topic_creation.serialize(out)
    }
}

impl KafkaRequest for Request {
    type Response = Response;

    fn api_key() -> i16 {
        3
    }

    fn api_version() -> i16 {
        6
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub throttle_time_ms: i32,
    pub brokers: Vec<Broker>,
    pub cluster_id: Option<String>,
    pub controller_id: i32,
    pub topic_metadata: Vec<TopicMetadata>
}

#[derive(Debug, Clone)]
pub struct Broker {
    pub node_id: i32,
    pub host: String,
    pub port: i32,
    pub rack: Option<String>
}

#[derive(Debug, Clone)]
pub struct TopicMetadata {
    pub error_code: i16,
    pub topic: String,
    pub is_internal: bool,
    pub partition_metadata: Vec<PartitionMetadata>
}

impl TopicMetadata {
    pub fn partition_ids(&self) -> impl Iterator<Item=i32> + '_ {
        self.partition_metadata.iter().map(|p| p.partition)
    }
}

#[derive(Debug, Clone)]
pub struct PartitionMetadata {
    pub error_code: i16,
    pub partition: i32,
    pub leader: i32,
    pub replicas: Vec<i32>,
    pub isr: Vec<i32>,
    pub offline_replicas: Vec<i32>
}

impl KafkaDeserializable for Response {
    fn deserialize<R: Read>(stream: &mut R) -> Result<Self> {
        Ok(Response {
            throttle_time_ms: i32::deserialize(stream)?,
            brokers: Vec::<Broker>::deserialize(stream)?,
            cluster_id: Option::<String>::deserialize(stream)?,
            controller_id: i32::deserialize(stream)?,
            topic_metadata: Vec::<TopicMetadata>::deserialize(stream)?
        })
    }
}

impl KafkaDeserializable for Broker {
    fn deserialize<R: Read>(stream: &mut R) -> Result<Self> {
        Ok(Broker {
            node_id: i32::deserialize(stream)?,
            host: String::deserialize(stream)?,
            port: i32::deserialize(stream)?,
            rack: Option::<String>::deserialize(stream)?
        })
    }
}

impl KafkaDeserializable for TopicMetadata {
    fn deserialize<R: Read>(stream: &mut R) -> Result<Self> {
        Ok(TopicMetadata {
            error_code: i16::deserialize(stream)?,
            topic: String::deserialize(stream)?,
            is_internal: bool::deserialize(stream)?,
            partition_metadata: Vec::<PartitionMetadata>::deserialize(stream)?
        })
    }
}

impl KafkaDeserializable for PartitionMetadata {
    fn deserialize<R: Read>(stream: &mut R) -> Result<Self> {
        Ok(PartitionMetadata {
            error_code: i16::deserialize(stream)?,
            partition: i32::deserialize(stream)?,
            leader: i32::deserialize(stream)?,
            replicas: Vec::<i32>::deserialize(stream)?,
            isr: Vec::<i32>::deserialize(stream)?,
            offline_replicas: Vec::<i32>::deserialize(stream)?
        })
    }
}
