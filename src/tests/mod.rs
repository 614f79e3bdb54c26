mod persistence;
mod printer;
mod stress;
