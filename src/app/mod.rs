pub mod dispatch;
mod roots;
