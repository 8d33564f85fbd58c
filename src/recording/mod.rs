pub mod audio_recorder;
pub mod detached_process;
pub use audio_recorder::ParecRecorder;
pub use audio_recorder::Recorder;
pub use detached_process::DetachedProcess;
