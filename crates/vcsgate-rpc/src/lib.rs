//! RPC dispatch, WSGI proxying, and live protocol streaming for the VCS
//! gateway. Mounted by `vcsgate-serverd`'s `#[launch]` function through
//! [`GatewayFairing`], matching the teacher's `ConfigManager` fairing in
//! `upsilon::lib`: extract config from the ignited `Rocket`'s figment,
//! build the managed state from it, and mount routes.

pub mod args;
pub mod b64;
pub mod config;
pub mod git_remote;
pub mod hg_remote;
mod routes;
pub mod server_control;
pub mod state;
pub mod svn_remote;
pub mod wsgi;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Build, Rocket};

pub use config::GatewayConfig;
pub use state::AppState;

/// Reads `GatewayConfig` out of the ignited rocket's figment, builds
/// [`AppState`] from it, and mounts every route from [`routes::routes`] at
/// the root path.
pub struct GatewayFairing;

#[rocket::async_trait]
impl Fairing for GatewayFairing {
    fn info(&self) -> Info {
        Info {
            name: "VCS gateway configurator",
            kind: Kind::Ignite | Kind::Singleton,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<GatewayConfig>() {
            Ok(config) => config,
            Err(e) => {
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        let state = AppState::from_config(&config);

        Ok(mount_routes(rocket.manage(state)))
    }
}

/// Mounts every route at the root path. Shared by [`GatewayFairing`] and
/// by integration tests, which build an [`AppState`] directly rather than
/// going through a figment-backed `vcsgate.yaml` file.
pub fn mount_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/", routes::routes())
}
