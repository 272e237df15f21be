pub mod config;
pub mod error;
pub mod launcher;
pub mod resolve;
pub mod sync;
pub mod transport;

#[cfg(test)]
mod tests;

/// Environment variable naming the directory that holds the viewer jar.
pub const VIEWER_PATH_ENV: &str = "SCROLLVIEW_PATH";
pub const VIEWER_JAR: &str = "ScrollView.jar";
pub const VIEWER_SHELL: &str = "sh";
pub const DEFAULT_VIEWER_HOST: &str = "localhost";
pub const DEFAULT_VIEWER_PORT: u16 = 8461;
pub const DEFAULT_VIEWER_ADDRESS: &str =
    const_format::concatcp!(DEFAULT_VIEWER_HOST, ":", DEFAULT_VIEWER_PORT);
