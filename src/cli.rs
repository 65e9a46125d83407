use clap::*;

pub fn app() -> App<'static, 'static> {
    App::new("kafka-group-tools")
        .version("1.0")
        .author("Joe Frikker <jfrikker@gmail.com>")
        .about("Utilities for managing Kafka consumer groups stored in ZooKeeper")
        .setting(AppSettings::SubcommandRequired)
        .arg(Arg::with_name("server")
            .short("s")
            .long("server")
            .value_name("host:port")
            .env("KAFKA_SERVERS")
            .multiple(true)
            .number_of_values(1)
            .use_delimiter(true)
            .help("A bootstrap host:port to connect to; discovered from ZooKeeper when omitted")
            .takes_value(true))
        .arg(Arg::with_name("zookeeper")
            .short("z")
            .long("zookeeper")
            .value_name("connect")
            .env("ZOOKEEPER_CONNECT")
            .default_value("localhost:2181")
            .help("ZooKeeper connect string, optionally with a chroot")
            .takes_value(true))
        .arg(Arg::with_name("zk-root")
            .long("zk-root")
            .value_name("path")
            .default_value("/consumers")
            .help("ZooKeeper path consumer groups are stored under")
            .takes_value(true))
        .arg(Arg::with_name("zk-timeout")
            .long("zk-timeout")
            .value_name("secs")
            .default_value("30")
            .help("ZooKeeper session timeout")
            .takes_value(true))
        .arg(Arg::with_name("metadata-timeout")
            .long("metadata-timeout")
            .value_name("secs")
            .default_value("10")
            .help("How long to wait for cluster metadata from the brokers")
            .takes_value(true))
        .subcommand(SubCommand::with_name("rename-group")
            .about("Renames a consumer group, migrating all of its offsets in ZooKeeper")
            .arg(Arg::with_name("old_groupid")
                .required(true)
                .index(1)
                .help("Consumer group ID to be renamed"))
            .arg(Arg::with_name("new_groupid")
                .required(true)
                .index(2)
                .help("New name for the consumer group ID")))
}
