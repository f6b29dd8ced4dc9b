pub mod tile_server;
