// Career coach chat: multi-turn conversation with the Groq model under a
// fixed coaching system prompt. No history is kept server-side; the client
// sends the whole conversation on each request.

pub mod handlers;
pub mod prompts;
