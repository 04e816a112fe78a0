pub mod bar;
pub mod bar_index;
pub mod mapper;
pub mod primitives;
pub mod types;

pub use bar::PriceBar;
pub use bar_index::{BarCollection, PriceBarIndex};
pub use mapper::{EpochDayOracle, SceneMapper, TimeOracle, price_to_scene_y, scene_y_to_price};
pub use types::{Color, FontSpec, ScenePoint, SceneRect};
