#[macro_use]
extern crate rocket;

use clap::Parser;
use figment::providers::Format;
use rocket::figment::providers::Yaml;

/// Runs the VCS gateway: a network-accessible RPC and smart-HTTP proxy
/// fronting Git, Mercurial, and Subversion repositories.
#[derive(Parser, Debug)]
struct Args {
    /// Path to the gateway's YAML configuration file.
    #[clap(long = "config", default_value = "vcsgate.yaml")]
    config: String,
}

#[launch]
fn rocket() -> rocket::Rocket<rocket::Build> {
    pretty_env_logger::init();

    let args = Args::parse();
    let figment = rocket::Config::figment().merge(Yaml::file(&args.config));

    rocket::custom(figment).attach(vcsgate_rpc::GatewayFairing)
}
