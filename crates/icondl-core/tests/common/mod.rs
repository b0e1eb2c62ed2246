pub mod icon_server;
