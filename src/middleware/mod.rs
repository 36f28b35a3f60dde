pub mod proxy_headers;
