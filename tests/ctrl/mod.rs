mod analysis;
mod synthesis;
