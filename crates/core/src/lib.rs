//! Erases burned-in overlay text from video by inpainting time-windowed
//! rectangular regions, frame by frame.

pub mod shared {
    pub mod constants;
    pub mod error;
    pub mod frame;
    pub mod video_metadata;
}

pub mod regions {
    pub mod domain {
        pub mod region;
        pub mod region_set;
        pub mod region_spec_parser;
    }
    pub mod infrastructure {
        pub mod config_loader;
    }
}

pub mod inpainting {
    pub mod domain {
        pub mod frame_inpainter;
        pub mod mask;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod inpaint_pipeline;
    pub mod pipeline_logger;
    pub mod run_config;
    pub mod video_processor;
}

pub mod video {
    pub mod domain {
        pub mod output_codec;
        pub mod video_reader;
        pub mod video_writer;
    }
    pub mod infrastructure;
}
