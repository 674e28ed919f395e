pub mod footer;
pub mod header;
pub mod pagination;
pub mod utils;

pub use footer::draw_footer;
pub use header::draw_header;
pub use pagination::draw_pagination;
pub use utils::truncate;
