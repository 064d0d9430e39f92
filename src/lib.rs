pub mod net;
pub mod topo;
pub mod trace;
pub mod viz;

#[cfg(test)]
mod test;
