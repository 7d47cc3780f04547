pub mod fingerprint;
pub mod plan;
pub mod reduce;
pub mod reshape;

#[cfg(test)]
mod tests;
