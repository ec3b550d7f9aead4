pub mod health;
pub mod notifications;
pub mod work_orders;
pub mod workflow;

#[cfg(test)]
mod tests;
