use blog_chrome::util::cwarn;

fn main() {
    if let Err(e) = blog_chrome::start() {
        cwarn(&format!("blog chrome did not start: {}", e));
    }
}
