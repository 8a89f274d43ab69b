pub mod results_client;

pub use results_client::{parse_results_body, ResultsClient, ResultsFetcher};
