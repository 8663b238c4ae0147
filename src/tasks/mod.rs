pub mod polling_loop;
