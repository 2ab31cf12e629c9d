mod assertions;
mod errors;
