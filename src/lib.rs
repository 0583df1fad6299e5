pub mod shared {
    pub mod core {
        pub mod primitives;
    }
    pub mod infrastructure {
        pub mod upstream;
    }
}

pub mod modules {
    pub mod discharge {
        pub mod core {
            pub mod anonymize;
            pub mod board;
            pub mod countdown;
            pub mod delay;
            pub mod ordering;
            pub mod phase;
            pub mod report;
            pub mod rows;
        }
        pub mod use_cases {
            pub mod fetch_report {
                pub mod handler;
                pub mod report_port;
            }
            pub mod view_dashboard {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
        }
        pub mod adapters {
            pub mod outbound {
                pub mod report_http;
                pub mod report_in_memory;
            }
        }
    }
    pub mod auth {
        pub mod core {
            pub mod ports;
            pub mod session;
            pub mod user;
        }
        pub mod use_cases {
            pub mod login {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod proxy_otp {
                pub mod inbound {
                    pub mod http;
                }
            }
        }
        pub mod adapters {
            pub mod outbound {
                pub mod gateway_http;
                pub mod gateway_in_memory;
            }
        }
    }
}

pub mod shell;
