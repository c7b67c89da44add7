// AST (Abstract Syntax Tree) definitions for the script front end

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Literal values appearing as expression leaves
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i32),
    Float(f32),
    String(String),
    Identifier(String),
    Boolean(bool),
    Null,
}

/// Flat tag for every expression shape.
///
/// Negation shares the `Minus` kind with subtraction; the two are told apart
/// by arity (1 vs 2 children).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    Literal,
    Condition,
    Call,
    ArrayAccess,
    MemberAccess,
    Array,

    Equal,
    Assign,
    LogNot,
    NotEqual,
    Divide,
    DivideAssign,
    Modulo,
    ModuloAssign,
    BinXor,
    BinXorAssign,
    BinNot,
    BinNotAssign,
    Multiply,
    MultiplyAssign,
    Pow,
    PowAssign,
    Lesser,
    Greater,
    LesserEqual,
    GreaterEqual,
    LeftShift,
    LeftShiftAssign,
    RightShift,
    RightShiftAssign,
    BinAnd,
    BinAndAssign,
    BinOr,
    BinOrAssign,
    LogAnd,
    LogOr,
    Plus,
    PlusAssign,
    Minus,
    MinusAssign,
    IncrementPre,
    DecrementPre,
    IncrementPost,
    DecrementPost,
}

/// Binary operators, one per left-associative tier entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Logical
    LogOr,
    LogAnd,
    // Bitwise
    BinOr,
    BinXor,
    BinAnd,
    // Equality
    Equal,
    NotEqual,
    // Relational
    Lesser,
    LesserEqual,
    Greater,
    GreaterEqual,
    // Shift
    LeftShift,
    RightShift,
    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Pow,
}

impl BinOp {
    pub fn kind(self) -> ExpressionKind {
        match self {
            BinOp::LogOr => ExpressionKind::LogOr,
            BinOp::LogAnd => ExpressionKind::LogAnd,
            BinOp::BinOr => ExpressionKind::BinOr,
            BinOp::BinXor => ExpressionKind::BinXor,
            BinOp::BinAnd => ExpressionKind::BinAnd,
            BinOp::Equal => ExpressionKind::Equal,
            BinOp::NotEqual => ExpressionKind::NotEqual,
            BinOp::Lesser => ExpressionKind::Lesser,
            BinOp::LesserEqual => ExpressionKind::LesserEqual,
            BinOp::Greater => ExpressionKind::Greater,
            BinOp::GreaterEqual => ExpressionKind::GreaterEqual,
            BinOp::LeftShift => ExpressionKind::LeftShift,
            BinOp::RightShift => ExpressionKind::RightShift,
            BinOp::Plus => ExpressionKind::Plus,
            BinOp::Minus => ExpressionKind::Minus,
            BinOp::Multiply => ExpressionKind::Multiply,
            BinOp::Divide => ExpressionKind::Divide,
            BinOp::Modulo => ExpressionKind::Modulo,
            BinOp::Pow => ExpressionKind::Pow,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::LogOr => "||",
            BinOp::LogAnd => "&&",
            BinOp::BinOr => "|",
            BinOp::BinXor => "^",
            BinOp::BinAnd => "&",
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::Lesser => "<",
            BinOp::LesserEqual => "<=",
            BinOp::Greater => ">",
            BinOp::GreaterEqual => ">=",
            BinOp::LeftShift => "<<",
            BinOp::RightShift => ">>",
            BinOp::Plus => "+",
            BinOp::Minus => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Modulo => "%",
            BinOp::Pow => "**",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,           // !x, not x
    BitNot,        // ~x
    Neg,           // -x
    PreIncrement,  // ++x
    PreDecrement,  // --x
    PostIncrement, // x++
    PostDecrement, // x--
}

impl UnOp {
    pub fn kind(self) -> ExpressionKind {
        match self {
            UnOp::Not => ExpressionKind::LogNot,
            UnOp::BitNot => ExpressionKind::BinNot,
            UnOp::Neg => ExpressionKind::Minus,
            UnOp::PreIncrement => ExpressionKind::IncrementPre,
            UnOp::PreDecrement => ExpressionKind::DecrementPre,
            UnOp::PostIncrement => ExpressionKind::IncrementPost,
            UnOp::PostDecrement => ExpressionKind::DecrementPost,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Not => "!",
            UnOp::BitNot => "~",
            UnOp::Neg => "-",
            UnOp::PreIncrement | UnOp::PostIncrement => "++",
            UnOp::PreDecrement | UnOp::PostDecrement => "--",
        }
    }

    pub fn is_postfix(self) -> bool {
        matches!(self, UnOp::PostIncrement | UnOp::PostDecrement)
    }
}

/// Plain and compound assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,           // =
    LeftShiftAssign,  // <<=
    RightShiftAssign, // >>=
    PlusAssign,       // +=
    MinusAssign,      // -=
    MultiplyAssign,   // *=
    PowAssign,        // **=
    DivideAssign,     // /=
    ModuloAssign,     // %=
    BinAndAssign,     // &=
    BinOrAssign,      // |=
    BinXorAssign,     // ^=
    BinNotAssign,     // ~=
}

impl AssignOp {
    pub fn kind(self) -> ExpressionKind {
        match self {
            AssignOp::Assign => ExpressionKind::Assign,
            AssignOp::LeftShiftAssign => ExpressionKind::LeftShiftAssign,
            AssignOp::RightShiftAssign => ExpressionKind::RightShiftAssign,
            AssignOp::PlusAssign => ExpressionKind::PlusAssign,
            AssignOp::MinusAssign => ExpressionKind::MinusAssign,
            AssignOp::MultiplyAssign => ExpressionKind::MultiplyAssign,
            AssignOp::PowAssign => ExpressionKind::PowAssign,
            AssignOp::DivideAssign => ExpressionKind::DivideAssign,
            AssignOp::ModuloAssign => ExpressionKind::ModuloAssign,
            AssignOp::BinAndAssign => ExpressionKind::BinAndAssign,
            AssignOp::BinOrAssign => ExpressionKind::BinOrAssign,
            AssignOp::BinXorAssign => ExpressionKind::BinXorAssign,
            AssignOp::BinNotAssign => ExpressionKind::BinNotAssign,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::LeftShiftAssign => "<<=",
            AssignOp::RightShiftAssign => ">>=",
            AssignOp::PlusAssign => "+=",
            AssignOp::MinusAssign => "-=",
            AssignOp::MultiplyAssign => "*=",
            AssignOp::PowAssign => "**=",
            AssignOp::DivideAssign => "/=",
            AssignOp::ModuloAssign => "%=",
            AssignOp::BinAndAssign => "&=",
            AssignOp::BinOrAssign => "|=",
            AssignOp::BinXorAssign => "^=",
            AssignOp::BinNotAssign => "~=",
        }
    }
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Unary {
        op: UnOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Assignment {
        op: AssignOp,
        target: Box<Expression>,
        value: Box<Expression>,
    },
    /// `condition ? then_expr : else_expr`
    Condition {
        condition: Box<Expression>,
        then_expr: Box<Expression>,
        else_expr: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    ArrayAccess {
        array: Box<Expression>,
        index: Box<Expression>,
    },
    MemberAccess {
        object: Box<Expression>,
        member: String,
    },
    Array(Vec<Expression>),
}

impl Expression {
    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Literal(Literal::Identifier(name.into()))
    }

    pub fn integer(value: i32) -> Self {
        Expression::Literal(Literal::Integer(value))
    }

    /// The flat kind tag of this node
    pub fn kind(&self) -> ExpressionKind {
        match self {
            Expression::Literal(_) => ExpressionKind::Literal,
            Expression::Unary { op, .. } => op.kind(),
            Expression::Binary { op, .. } => op.kind(),
            Expression::Assignment { op, .. } => op.kind(),
            Expression::Condition { .. } => ExpressionKind::Condition,
            Expression::Call { .. } => ExpressionKind::Call,
            Expression::ArrayAccess { .. } => ExpressionKind::ArrayAccess,
            Expression::MemberAccess { .. } => ExpressionKind::MemberAccess,
            Expression::Array(_) => ExpressionKind::Array,
        }
    }

    /// Child expressions in evaluation order
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal(_) => Vec::new(),
            Expression::Unary { operand, .. } => vec![operand.as_ref()],
            Expression::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expression::Assignment { target, value, .. } => {
                vec![target.as_ref(), value.as_ref()]
            }
            Expression::Condition {
                condition,
                then_expr,
                else_expr,
            } => vec![condition.as_ref(), then_expr.as_ref(), else_expr.as_ref()],
            Expression::Call { callee, arguments } => {
                let mut children = Vec::with_capacity(arguments.len() + 1);
                children.push(callee.as_ref());
                children.extend(arguments.iter());
                children
            }
            Expression::ArrayAccess { array, index } => vec![array.as_ref(), index.as_ref()],
            Expression::MemberAccess { object, .. } => vec![object.as_ref()],
            Expression::Array(elements) => elements.iter().collect(),
        }
    }

    pub fn is_condition(&self) -> bool {
        matches!(self, Expression::Condition { .. })
    }
}

/// `var "name" = init` / `const "name" = init`
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationExpression {
    pub name: String,
    pub initializer: Expression,
    pub is_const: bool,
}

/// Brace-delimited statement sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound {
    pub statements: Vec<Statement>,
}

impl Compound {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Tail of an `if` statement. Holding an `else if` and an `else` body at the
/// same time is not representable.
#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    ElseIf(Box<IfStatement>),
    Else(Compound),
}

#[derive(Debug, Clone)]
pub struct IfStatement {
    pub condition: Expression,
    pub body: Compound,
    pub else_branch: Option<ElseBranch>,
}

// `else if` chains have no length limit, so comparing and dropping walk the
// chain in a loop

impl PartialEq for IfStatement {
    fn eq(&self, other: &Self) -> bool {
        let (mut left, mut right) = (self, other);
        loop {
            if left.condition != right.condition || left.body != right.body {
                return false;
            }
            match (&left.else_branch, &right.else_branch) {
                (Some(ElseBranch::ElseIf(next_left)), Some(ElseBranch::ElseIf(next_right))) => {
                    left = &**next_left;
                    right = &**next_right;
                }
                (left_branch, right_branch) => return left_branch == right_branch,
            }
        }
    }
}

impl Drop for IfStatement {
    fn drop(&mut self) {
        let mut next = self.else_branch.take();
        while let Some(ElseBranch::ElseIf(mut statement)) = next {
            next = statement.else_branch.take();
        }
    }
}

impl IfStatement {
    pub fn else_if(&self) -> Option<&IfStatement> {
        match &self.else_branch {
            Some(ElseBranch::ElseIf(next)) => Some(next),
            _ => None,
        }
    }

    pub fn else_body(&self) -> Option<&Compound> {
        match &self.else_branch {
            Some(ElseBranch::Else(body)) => Some(body),
            _ => None,
        }
    }
}

/// `case <const_expr>: body`
#[derive(Debug, Clone, PartialEq)]
pub struct CaseLine {
    pub const_expr: Expression,
    pub body: Compound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    pub subject: Expression,
    pub cases: Vec<CaseLine>,
    pub default: Option<Compound>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForEachStatement {
    pub binding: String,
    pub source: Expression,
    pub body: Compound,
}

/// First clause of a classic `for`
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Declaration(DeclarationExpression),
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub init: Option<ForInit>,
    pub condition: Option<Expression>,
    pub increment: Option<Expression>,
    pub body: Compound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Compound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStatement {
    pub body: Compound,
    pub condition: Expression,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionParameter {
    Named {
        name: String,
        default: Option<Expression>,
    },
    /// Trailing `...` slot
    Variadic,
}

impl FunctionParameter {
    pub fn name(&self) -> Option<&str> {
        match self {
            FunctionParameter::Named { name, .. } => Some(name),
            FunctionParameter::Variadic => None,
        }
    }

    pub fn default(&self) -> Option<&Expression> {
        match self {
            FunctionParameter::Named { default, .. } => default.as_ref(),
            FunctionParameter::Variadic => None,
        }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self, FunctionParameter::Variadic)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionStatement {
    pub name: String,
    pub parameters: Vec<FunctionParameter>,
    /// `None` for a forward declaration
    pub body: Option<Compound>,
}

impl FunctionStatement {
    pub fn is_forward_declaration(&self) -> bool {
        self.body.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSegment {
    Name(String),
    /// `*`, only valid as the last segment
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub path: Vec<ImportSegment>,
}

/// Statement nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(Expression),
    Declaration(DeclarationExpression),
    If(IfStatement),
    Switch(SwitchStatement),
    ForEach(ForEachStatement),
    For(ForStatement),
    While(WhileStatement),
    DoWhile(DoWhileStatement),
    Break,
    Continue,
    /// Colon-separated list, never empty
    Return(Vec<Expression>),
    Function(FunctionStatement),
    Import(ImportStatement),
}

/// Root of a parsed translation unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyntaxTree {
    pub root: Compound,
}

impl SyntaxTree {
    pub fn new(root: Compound) -> Self {
        SyntaxTree { root }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.root.statements
    }
}
