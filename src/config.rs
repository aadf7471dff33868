use std::{env, net::SocketAddr};

pub const DEFAULT_SOURCE_URL: &str = "https://script.google.com/macros/s/AKfycbzxXmTlxzi_DNjy2kume35loHfgFicyCSeIuUjtoe6uhS_XXL7qU2DI04xmrPBLEXy2TA/exec";
pub const DEFAULT_TITLE: &str = "Painel Churrasco do PPGEE UFSM";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub source_url: String,
    pub title: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            source_url: non_empty_var("DASHBOARD_SOURCE_URL")
                .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
            title: non_empty_var("DASHBOARD_TITLE").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
