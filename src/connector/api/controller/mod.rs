pub mod api_controller;
pub mod explain_controller;
pub mod index_controller;
pub mod reset_controller;
pub mod search_controller;
pub mod status_controller;
pub mod summarize_controller;

pub use api_controller::ApiController;
pub use explain_controller::ExplainController;
pub use index_controller::IndexController;
pub use reset_controller::ResetController;
pub use search_controller::{SearchController, SearchOptions};
pub use status_controller::StatusController;
pub use summarize_controller::SummarizeController;
