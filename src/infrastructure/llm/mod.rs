mod openai;

pub use self::openai::OpenAiLlm;
