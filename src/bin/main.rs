fn main() {
  spendfrom::main();
}
