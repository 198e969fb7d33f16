pub mod arcgis;
pub mod esri;
pub mod etl;
pub mod extent;
pub mod packager;
pub mod pipeline;
pub mod walker;

pub use crate::domain::model::{Dataset, DateExtent, LayerDescriptor, ServiceDescriptor};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
