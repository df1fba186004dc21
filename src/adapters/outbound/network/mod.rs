/// Network adapters for external API calls
mod reqwest_client;

pub use reqwest_client::ReqwestHttpClient;
