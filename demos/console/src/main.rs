// pubnub-console: a small CLI exercising publish/subscribe end to end
// against a live origin, for manual smoke-testing the client crate.

use clap::{Arg, ArgAction, Command, value_parser};
use tracing::info;

use pubnub::{Keyset, PubNub, PubNubConfig};

fn build_cli() -> Command {
    Command::new("pubnub-console")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A console client for exercising publish/subscribe")
        .arg(
            Arg::new("origin")
                .long("origin")
                .value_name("host")
                .default_value("ps.pndsn.com"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .value_parser(value_parser!(u16))
                .default_value("443"),
        )
        .arg(Arg::new("publish-key").long("publish-key").value_name("key").required(true))
        .arg(Arg::new("subscribe-key").long("subscribe-key").value_name("key").required(true))
        .arg(Arg::new("secret-key").long("secret-key").value_name("key"))
        .arg(Arg::new("user-id").long("user-id").value_name("id").default_value("pubnub-console"))
        .arg(Arg::new("cipher-key").long("cipher-key").value_name("key"))
        .arg(
            Arg::new("no-tls")
                .long("no-tls")
                .action(ArgAction::SetTrue)
                .help("Connect over plain HTTP instead of TLS"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("publish")
                .about("Publish one message to a channel")
                .arg(Arg::new("channel").required(true))
                .arg(Arg::new("message").required(true)),
        )
        .subcommand(
            Command::new("subscribe")
                .about("Subscribe in a loop, printing each message received")
                .arg(Arg::new("channel").required(true))
                .arg(
                    Arg::new("rounds")
                        .long("rounds")
                        .value_parser(value_parser!(u32))
                        .default_value("0")
                        .help("Stop after this many long-poll rounds (0 = run forever)"),
                ),
        )
        .subcommand(Command::new("time").about("Fetch the origin's current timetoken"))
}

fn config_from_matches(matches: &clap::ArgMatches) -> PubNubConfig {
    let mut keys = Keyset::new(
        matches.get_one::<String>("publish-key").unwrap(),
        matches.get_one::<String>("subscribe-key").unwrap(),
    );
    if let Some(secret) = matches.get_one::<String>("secret-key") {
        keys = keys.with_secret_key(secret);
    }
    let user_id = matches.get_one::<String>("user-id").unwrap();
    let port = *matches.get_one::<u16>("port").unwrap();
    let mut config = PubNubConfig::new(keys, user_id).with_origin(matches.get_one::<String>("origin").unwrap(), port);
    if matches.get_flag("no-tls") {
        config = config.with_tls(false);
    }
    config
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let matches = build_cli().get_matches();
    let config = config_from_matches(&matches);
    let mut client = PubNub::new(config);
    if let Some(cipher_key) = matches.get_one::<String>("cipher-key") {
        client = client.with_cipher_key(cipher_key);
    }

    let result = match matches.subcommand() {
        Some(("publish", sub)) => {
            let channel = sub.get_one::<String>("channel").unwrap();
            let message = sub.get_one::<String>("message").unwrap();
            run_publish(&mut client, channel, message).await
        }
        Some(("subscribe", sub)) => {
            let channel = sub.get_one::<String>("channel").unwrap();
            let rounds = *sub.get_one::<u32>("rounds").unwrap();
            run_subscribe(&mut client, channel, rounds).await
        }
        Some(("time", _)) => run_time(&mut client).await,
        _ => unreachable!("subcommand_required(true)"),
    };

    if let Err(err) = result {
        eprintln!("FATAL: {err}");
        std::process::exit(1);
    }
}

async fn run_publish(client: &mut PubNub, channel: &str, message: &str) -> Result<(), pubnub::ClientError> {
    let timetoken = client.publish(channel, message).await?;
    info!(channel, timetoken = %timetoken, "published");
    println!("{timetoken}");
    Ok(())
}

async fn run_subscribe(client: &mut PubNub, channel: &str, rounds: u32) -> Result<(), pubnub::ClientError> {
    let channels = vec![channel.to_owned()];
    info!(channel, cursor = ?client.cursor(), "subscribing");
    let mut round = 0u32;
    loop {
        let messages = client.subscribe(&channels, &[]).await?;
        for message in messages {
            println!("{}: {}", message.channel, message.payload);
        }
        round += 1;
        if rounds != 0 && round >= rounds {
            break;
        }
    }
    Ok(())
}

async fn run_time(client: &mut PubNub) -> Result<(), pubnub::ClientError> {
    let timetoken = client.time().await?;
    println!("{timetoken}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_requires_a_subcommand() {
        let result = build_cli().try_get_matches_from(["pubnub-console", "--publish-key", "p", "--subscribe-key", "s"]);
        assert!(result.is_err());
    }

    #[test]
    fn publish_subcommand_parses_channel_and_message() {
        let matches = build_cli()
            .try_get_matches_from([
                "pubnub-console",
                "--publish-key",
                "p",
                "--subscribe-key",
                "s",
                "publish",
                "chan",
                "hello",
            ])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "publish");
        assert_eq!(sub.get_one::<String>("channel").unwrap(), "chan");
    }
}
