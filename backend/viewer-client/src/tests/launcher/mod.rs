mod process;
mod thread;
mod viewer;
