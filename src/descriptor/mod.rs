//! Deployment-descriptor parsing and auto-reconfiguration injection.

pub mod mutator;
pub mod tree;

pub use mutator::{ConfigurationBundle, DescriptorMutator};
pub use tree::{DescriptorError, DescriptorTree, XmlElement, XmlNode};
