// Edit-mode controller, phone/email validators and their HTTP surface.

pub mod controller;
pub mod handlers;
pub mod validation;
