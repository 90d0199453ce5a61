pub mod rdns;
