pub mod dispatch_service;
pub mod engines;
pub mod http_helpers;
pub mod model_service;
pub mod normalizer_service;
pub mod pipeline_service;
pub mod prompt_service;
