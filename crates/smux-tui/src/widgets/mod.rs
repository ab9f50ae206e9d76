pub mod onoff;
