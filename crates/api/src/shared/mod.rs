pub mod auth;
pub mod deadline;
pub mod paging;
pub mod usecase;

#[cfg(test)]
pub mod test_helpers;
