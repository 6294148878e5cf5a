
mod test_generate;
mod test_quota;
