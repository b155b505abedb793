mod test_license;
mod test_scheduler;
mod test_signing;
