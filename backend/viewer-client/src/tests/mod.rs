mod launcher;
mod transport;
