// Domain-layer modules and shared errors/models
pub mod xml_reader {
    pub use crate::xml_reader::*;
}

pub mod normalizer {
    pub use crate::normalizer::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
