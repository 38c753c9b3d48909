pub mod default_user_seed;
