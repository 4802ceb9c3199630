//! Projects: coordinates, descriptors, dependency inference and synthesis

pub mod coordinate;
pub mod dependencies;
pub mod descriptor;
pub mod manifest;
pub mod model;
pub mod synthesizer;
pub mod workspace;

pub use coordinate::{Coordinate, DEFAULT_GROUP_ID, DEFAULT_VERSION, DEPENDENCY_VERSION};
pub use dependencies::{ClasspathProvider, DependencyInferrer};
pub use descriptor::ProjectDescriptor;
pub use model::{Project, ProjectDependency, DESCRIPTOR_FILE_NAME};
pub use synthesizer::{ProjectSynthesizer, SynthesizedProject};
pub use workspace::{purge_deferred, TemporaryWorkspace};
