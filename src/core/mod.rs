// Domain-layer modules and shared errors
pub mod decoder {
    pub use crate::decoder::*;
}

pub mod pipeline {
    pub use crate::pipeline::*;
}

pub mod reconciler {
    pub use crate::reconciler::*;
}

pub mod errors {
    pub use crate::errors::*;
}
