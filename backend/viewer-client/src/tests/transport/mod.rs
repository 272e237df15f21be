mod framing;
mod retry;
