pub mod cache;
pub mod context;
pub mod error;
pub mod logging;
pub mod registry;
pub mod schema;
pub mod step;
pub mod template;
pub mod utils;

pub use cache::MetadataCache;
pub use context::BuildContext;
pub use error::{
    StepError,
    StepResult,
};
pub use registry::StepRegistry;
pub use schema::{
    ConfigField,
    ConfigSchema,
};
pub use step::{
    ReleaseStep,
    StepMetadata,
};
pub use template::VariableResolver;
pub use utils::RetryPolicy;

#[macro_export]
macro_rules! register_step {
    ($step_type:ty) => {
        pub fn register(registry: &mut $crate::StepRegistry) {
            registry.register(Box::new(<$step_type>::default()));
        }
    };
}
