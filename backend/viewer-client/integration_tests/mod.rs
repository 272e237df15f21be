mod helpers;

mod launcher {
    mod process;
}

mod transport {
    mod connection;
    mod connector;
}
