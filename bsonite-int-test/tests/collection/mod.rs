mod find_test;
mod index_test;
mod insert_test;
mod remove_test;
mod update_test;
