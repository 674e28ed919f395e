mod post_detail;
mod post_list;

pub use post_detail::draw_post_detail;
pub use post_list::draw_post_list;
