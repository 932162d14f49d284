use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt};

use crate::Result;
use crate::error::Error;

const DEFAULT_FILTER: &str = "info,tower_http=info";

/// Initialise tracing pour le serveur.
///
/// Le filtre vient de `--log-filter`, sinon de `RUST_LOG`, sinon du défaut
/// `info`. Un candidat invalide est ignoré au profit du suivant.
///
/// # Errors
///
/// Retourne une erreur si la sortie JSON est demandée sans la fonctionnalité
/// `json-logs`, ou si un subscriber global est déjà installé.
pub fn init_tracing(explicit_filter: Option<&str>, use_json: bool) -> Result<()> {
    let filter = pick_filter(explicit_filter, std::env::var("RUST_LOG").ok().as_deref())?;

    #[cfg(feature = "json-logs")]
    if use_json {
        let subscriber = Registry::default().with(filter).with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_current_span(true)
                .json()
                .flatten_event(true),
        );
        return tracing::subscriber::set_global_default(subscriber)
            .map_err(|err| Error::Telemetry(err.to_string()));
    }

    #[cfg(not(feature = "json-logs"))]
    if use_json {
        return Err(Error::Telemetry(
            "binary was built without the `json-logs` feature".to_string(),
        ));
    }

    let subscriber = Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true));
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| Error::Telemetry(err.to_string()))
}

fn pick_filter(explicit: Option<&str>, env: Option<&str>) -> Result<EnvFilter> {
    [explicit, env, Some(DEFAULT_FILTER)]
        .into_iter()
        .flatten()
        .find_map(|candidate| EnvFilter::try_new(candidate).ok())
        .ok_or_else(|| Error::Telemetry("invalid log filter".to_string()))
}

#[cfg(test)]
mod tests {
    use super::pick_filter;

    #[test]
    fn explicit_filter_wins() {
        match pick_filter(Some("logalert=debug"), Some("warn")) {
            Ok(filter) => assert_eq!(filter.to_string(), "logalert=debug"),
            Err(err) => panic!("filter: {err}"),
        }
    }

    #[test]
    fn invalid_candidates_fall_through() {
        match pick_filter(Some("logalert=loud"), None) {
            Ok(filter) => assert!(filter.to_string().contains("info")),
            Err(err) => panic!("filter: {err}"),
        }
    }
}
