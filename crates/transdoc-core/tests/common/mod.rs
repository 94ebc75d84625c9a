#![allow(dead_code)]

pub mod translation_server;
